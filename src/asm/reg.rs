use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Rax,
    Rdi,
    Rsi,
    Rdx,
    Rcx,
    R8,
    R9,
    Rbp,
    Rsp,
    Al,
    Dil,
    Sil,
    Dl,
    Cl,
    R8b,
    R9b,
}

/// Argument-passing registers in System V AMD64 order.
pub const ARG_REGS: [Reg; 6] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

impl Reg {
    /// The 1-byte alias of this register.
    pub fn byte(self) -> Reg {
        match self {
            Reg::Rax => Reg::Al,
            Reg::Rdi => Reg::Dil,
            Reg::Rsi => Reg::Sil,
            Reg::Rdx => Reg::Dl,
            Reg::Rcx => Reg::Cl,
            Reg::R8 => Reg::R8b,
            Reg::R9 => Reg::R9b,
            reg => reg,
        }
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Reg::Rax => "rax",
            Reg::Rdi => "rdi",
            Reg::Rsi => "rsi",
            Reg::Rdx => "rdx",
            Reg::Rcx => "rcx",
            Reg::R8 => "r8",
            Reg::R9 => "r9",
            Reg::Rbp => "rbp",
            Reg::Rsp => "rsp",
            Reg::Al => "al",
            Reg::Dil => "dil",
            Reg::Sil => "sil",
            Reg::Dl => "dl",
            Reg::Cl => "cl",
            Reg::R8b => "r8b",
            Reg::R9b => "r9b",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_aliases() {
        assert_eq!(Reg::Rdi.byte(), Reg::Dil);
        assert_eq!(Reg::R9.byte(), Reg::R9b);
        assert_eq!(Reg::Al.byte(), Reg::Al);
    }

    #[test]
    fn test_arg_reg_names() {
        let names = ARG_REGS.map(|reg| reg.to_string());
        assert_eq!(names, ["rdi", "rsi", "rdx", "rcx", "r8", "r9"]);

        let bytes = ARG_REGS.map(|reg| reg.byte().to_string());
        assert_eq!(bytes, ["dil", "sil", "dl", "cl", "r8b", "r9b"]);
    }
}
