use std::{fmt::Display, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// The baud rates a link may be opened at.
///
/// The set is closed: devices this tool talks to advertise one of these
/// five rates, and a typo'd rate should be rejected up front rather than
/// handed to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum BaudRate {
    /// 9600 baud, the device default.
    B9600,
    /// 19200 baud.
    B19200,
    /// 38400 baud.
    B38400,
    /// 57600 baud.
    B57600,
    /// 115200 baud.
    B115200,
}

impl Default for BaudRate {
    fn default() -> Self {
        Self::B9600
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        match baud {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            9_600 => Ok(Self::B9600),
            19_200 => Ok(Self::B19200),
            38_400 => Ok(Self::B38400),
            57_600 => Ok(Self::B57600),
            115_200 => Ok(Self::B115200),
            other => Err(format!(
                "`{other}` is not a supported baud rate (use one of 9600, 19200, 38400, 57600, 115200)"
            )),
        }
    }
}

impl FromStr for BaudRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .parse()
            .map_err(|_| format!("`{s}` is not a number"))?;
        Self::try_from(value)
    }
}

impl Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u32::from(*self))
    }
}

/// How a link should be opened.
///
/// Data bits (8), parity (none) and stop bits (1) are fixed and therefore
/// not part of the configuration. Changing any field of an open link
/// requires closing and reopening it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// The port to open. Likely "/dev/ttyACMx" or "COMx".
    pub port: String,

    /// The baud rate.
    #[serde(default)]
    pub baud: BaudRate,

    /// How long a single read may wait for a line before yielding.
    /// This bounds how quickly a close request is honored.
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(1)
}

impl LinkConfig {
    /// A configuration for the given port with the default baud rate
    /// and read timeout.
    pub fn new<S: AsRef<str>>(port: S) -> Self {
        Self {
            port: port.as_ref().into(),
            baud: BaudRate::default(),
            read_timeout: default_read_timeout(),
        }
    }

    /// Set the baud rate.
    pub fn baud(mut self, baud: BaudRate) -> Self {
        self.baud = baud;
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn ron() -> ron::Options {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .with_default_extension(ron::extensions::Extensions::UNWRAP_NEWTYPES)
    }

    /// Deserialize a .ron file's contents.
    /// Panics if the input is not valid .ron.
    pub fn deserialize(input: &str) -> Self {
        Self::ron().from_str::<LinkConfig>(input).unwrap()
    }

    /// An example configuration with some fields filled in.
    pub fn example() -> Self {
        Self::new("/dev/ttyACM0").baud(BaudRate::B115200)
    }

    /// Serialize the configuration in a "pretty" (i.e. non-compact) fashion.
    pub fn serialize_pretty(&self) -> String {
        Self::ron()
            .to_string_pretty(self, ron::ser::PrettyConfig::default())
            .unwrap()
    }

    /// Setup a new configuration from a RON file.
    pub fn new_from_path<P: AsRef<Path>>(p: P) -> Self {
        let s = std::fs::read_to_string(p).unwrap();

        Self::deserialize(&s)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn serialize() {
        let c = LinkConfig::example();

        println!("{}", c.serialize_pretty());
    }

    #[test]
    fn deserialize() {
        let input = r#"
(
    port: "COM3",
    baud: 57600,
)
"#;
        let config = LinkConfig::deserialize(input);

        assert_eq!(config.port, "COM3");
        assert_eq!(config.baud, BaudRate::B57600);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
    }

    #[test]
    fn roundtrip() {
        let c = LinkConfig::example();
        let again = LinkConfig::deserialize(&c.serialize_pretty());

        assert_eq!(c, again);
    }

    #[test]
    fn baud_outside_the_set_is_rejected() {
        assert!("9600".parse::<BaudRate>().is_ok());
        assert!("9601".parse::<BaudRate>().is_err());
        assert!("fast".parse::<BaudRate>().is_err());
    }

    #[test]
    fn baud_displays_as_the_number() {
        assert_eq!(BaudRate::B115200.to_string(), "115200");
    }
}
