//! Kernel diagnostics: interrupt frame layout and dumping.

use crate::klog_info;

/// Machine state pushed by the interrupt trampoline, in push order.
///
/// The dispatcher treats the frame as read-only for the duration of the
/// handler call; it is never retained past it.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct InterruptFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// Dump an interrupt frame to the kernel log.
pub fn kdiag_dump_interrupt_frame(frame: *const InterruptFrame) {
    if frame.is_null() {
        klog_info!("KDIAG: <null interrupt frame>");
        return;
    }
    let f = unsafe { &*frame };
    klog_info!(
        "KDIAG: vector={} error_code={:#x}",
        f.vector,
        f.error_code
    );
    klog_info!(
        "KDIAG: rip={:#018x} cs={:#06x} rflags={:#010x}",
        f.rip,
        f.cs,
        f.rflags
    );
    klog_info!("KDIAG: rsp={:#018x} ss={:#06x}", f.rsp, f.ss);
    klog_info!(
        "KDIAG: rax={:#018x} rbx={:#018x} rcx={:#018x}",
        f.rax,
        f.rbx,
        f.rcx
    );
    klog_info!(
        "KDIAG: rdx={:#018x} rsi={:#018x} rdi={:#018x}",
        f.rdx,
        f.rsi,
        f.rdi
    );
    klog_info!(
        "KDIAG: rbp={:#018x} r8={:#018x} r9={:#018x}",
        f.rbp,
        f.r8,
        f.r9
    );
    klog_info!(
        "KDIAG: r10={:#018x} r11={:#018x} r12={:#018x}",
        f.r10,
        f.r11,
        f.r12
    );
    klog_info!(
        "KDIAG: r13={:#018x} r14={:#018x} r15={:#018x}",
        f.r13,
        f.r14,
        f.r15
    );
}
