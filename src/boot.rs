//! Entry trampoline. The bootloader jumps to `_start` in 32-bit protected
//! mode with paging off, `eax` holding its magic and `ebx` the boot info.

use core::arch::global_asm;

use kestrel::multiboot::{self, MultibootHeader};

#[used]
#[link_section = ".multiboot"]
static MULTIBOOT_HEADER: MultibootHeader = multiboot::HEADER;

global_asm!(
    ".section .bss",
    ".align 16",
    "boot_stack_bottom:",
    ".skip 131072",
    "boot_stack_top:",
    ".section .text",
    ".global _start",
    ".type _start, @function",
    "_start:",
    "cli",
    "lea esp, [boot_stack_top]",
    // Keep the stack 16-byte aligned at the call.
    "sub esp, 8",
    "push ebx",
    "push eax",
    "call kernel_main",
    "2:",
    "cli",
    "hlt",
    "jmp 2b",
);
