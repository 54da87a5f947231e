use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Operating system an implementation targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Os {
    /// Wildcard
    #[default]
    All,
    Linux,
    Solaris,
    FreeBsd,
    Darwin,
    MacOsx,
    Cygwin,
    Posix,
    Windows,
    Unknown,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::All => "*",
            Os::Linux => "Linux",
            Os::Solaris => "Solaris",
            Os::FreeBsd => "FreeBSD",
            Os::Darwin => "Darwin",
            Os::MacOsx => "MacOSX",
            Os::Cygwin => "Cygwin",
            Os::Posix => "POSIX",
            Os::Windows => "Windows",
            Os::Unknown => "unknown",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "*" => Os::All,
            "Linux" => Os::Linux,
            "Solaris" => Os::Solaris,
            "FreeBSD" => Os::FreeBsd,
            "Darwin" => Os::Darwin,
            "MacOSX" => Os::MacOsx,
            "Cygwin" => Os::Cygwin,
            "POSIX" => Os::Posix,
            "Windows" => Os::Windows,
            _ => Os::Unknown,
        }
    }

    /// Whether code built for `self` runs on `target`
    pub fn runs_on(self, target: Os) -> bool {
        if self == Os::All || target == Os::All || self == target {
            return true;
        }
        matches!(
            (self, target),
            (Os::Posix, Os::Linux | Os::Solaris | Os::FreeBsd | Os::Darwin | Os::MacOsx | Os::Cygwin)
                | (Os::Darwin, Os::MacOsx)
                | (Os::Windows, Os::Cygwin)
        )
    }
}

/// Processor an implementation targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cpu {
    /// Wildcard (binary code only, never source)
    #[default]
    All,
    I386,
    I486,
    I586,
    I686,
    X64,
    Ppc,
    Ppc64,
    ArmV6l,
    ArmV7l,
    Aarch64,
    /// Source code that must be compiled first
    Source,
    Unknown,
}

impl Cpu {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cpu::All => "*",
            Cpu::I386 => "i386",
            Cpu::I486 => "i486",
            Cpu::I586 => "i586",
            Cpu::I686 => "i686",
            Cpu::X64 => "x86_64",
            Cpu::Ppc => "ppc",
            Cpu::Ppc64 => "ppc64",
            Cpu::ArmV6l => "armv6l",
            Cpu::ArmV7l => "armv7l",
            Cpu::Aarch64 => "aarch64",
            Cpu::Source => "src",
            Cpu::Unknown => "unknown",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "*" => Cpu::All,
            "i386" => Cpu::I386,
            "i486" => Cpu::I486,
            "i586" => Cpu::I586,
            "i686" => Cpu::I686,
            "x86_64" => Cpu::X64,
            "ppc" | "ppc32" => Cpu::Ppc,
            "ppc64" => Cpu::Ppc64,
            "armv6l" => Cpu::ArmV6l,
            "armv7l" | "armhf" => Cpu::ArmV7l,
            "aarch64" => Cpu::Aarch64,
            "src" => Cpu::Source,
            _ => Cpu::Unknown,
        }
    }

    // Position in the x86 family; newer processors run older code
    fn x86_level(self) -> Option<u8> {
        match self {
            Cpu::I386 => Some(1),
            Cpu::I486 => Some(2),
            Cpu::I586 => Some(3),
            Cpu::I686 => Some(4),
            Cpu::X64 => Some(5),
            _ => None,
        }
    }

    /// Whether code built for `self` runs on `target`
    pub fn runs_on(self, target: Cpu) -> bool {
        if self == Cpu::Source {
            return target == Cpu::Source;
        }
        if self == Cpu::All || target == Cpu::All || self == target {
            return true;
        }
        if let (Some(own), Some(other)) = (self.x86_level(), target.x86_level()) {
            return own <= other;
        }
        matches!((self, target), (Cpu::Ppc, Cpu::Ppc64) | (Cpu::ArmV6l, Cpu::ArmV7l))
    }
}

/// Operating system and processor, either of which may be a wildcard.
///
/// Written as `OS-CPU`, e.g. `Linux-x86_64` or `*-src`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Architecture {
    pub os: Os,
    pub cpu: Cpu,
}

impl Architecture {
    pub fn new(os: Os, cpu: Cpu) -> Self {
        Architecture { os, cpu }
    }

    /// Whether an implementation built for `self` can run on `required`
    pub fn is_compatible(&self, required: &Architecture) -> bool {
        self.os.runs_on(required.os) && self.cpu.runs_on(required.cpu)
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, cpu) = s
            .split_once('-')
            .ok_or_else(|| format!("Architecture must be written as OS-CPU: {}", s))?;
        Ok(Architecture::new(Os::parse(os), Cpu::parse(cpu)))
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.cpu.as_str())
    }
}

impl Serialize for Architecture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Architecture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
