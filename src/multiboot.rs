//! Multiboot (version 1) header and the parts of the boot information
//! structure the kernel reads.

pub const HEADER_MAGIC: u32 = 0x1BADB002;
/// Value a compliant bootloader leaves in `eax` before jumping to the kernel.
pub const BOOTLOADER_MAGIC: u32 = 0x2BADB002;

/// Flag bit 0: load modules on page boundaries.
pub const ALIGN_MODULES: u32 = 1 << 0;
/// Flag bit 1: fill in the `mem_*` fields of the boot information.
pub const MEMORY_INFO: u32 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct MultibootHeader {
    pub magic: u32,
    pub flags: u32,
    pub checksum: u32,
}

impl MultibootHeader {
    pub const fn new(flags: u32) -> MultibootHeader {
        MultibootHeader {
            magic: HEADER_MAGIC,
            flags,
            checksum: 0u32.wrapping_sub(HEADER_MAGIC.wrapping_add(flags)),
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.magic == HEADER_MAGIC
            && self
                .magic
                .wrapping_add(self.flags)
                .wrapping_add(self.checksum)
                == 0
    }

    /// Little-endian image of the header as it sits in the binary.
    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0; 12];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }
}

pub const HEADER: MultibootHeader = MultibootHeader::new(ALIGN_MODULES | MEMORY_INFO);

/// Leading fields of the boot information block handed over in `ebx`.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct BootInfo {
    pub flags: u32,
    pub mem_lower: u32,
    pub mem_upper: u32,
}

impl BootInfo {
    /// # Safety
    /// `address` must be the value the bootloader passed in `ebx` and the
    /// structure must still be mapped and unmodified.
    pub unsafe fn from_address(address: u32) -> Option<&'static BootInfo> {
        (address as usize as *const BootInfo).as_ref()
    }

    /// Lower and upper memory in KiB, if the bootloader provided them.
    pub fn memory_kib(&self) -> Option<(u32, u32)> {
        if self.flags & 1 == 0 {
            return None;
        }
        Some((self.mem_lower, self.mem_upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_cancels_magic_and_flags() {
        assert_eq!(HEADER.flags, 0b11);
        assert_eq!(HEADER.checksum, 0xE4524FFB);
        assert!(HEADER.is_valid());
        assert!(!MultibootHeader { checksum: 0, ..HEADER }.is_valid());
    }

    #[test]
    fn header_bytes_are_little_endian() {
        assert_eq!(
            HEADER.to_bytes(),
            [0x02, 0xB0, 0xAD, 0x1B, 0x03, 0, 0, 0, 0xFB, 0x4F, 0x52, 0xE4]
        );
        assert_eq!(core::mem::size_of::<MultibootHeader>(), 12);
    }

    #[test]
    fn memory_fields_require_flag() {
        let info = BootInfo {
            flags: 0,
            mem_lower: 639,
            mem_upper: 130048,
        };
        assert_eq!(info.memory_kib(), None);
        let info = BootInfo { flags: 1, ..info };
        assert_eq!(info.memory_kib(), Some((639, 130048)));
    }
}
