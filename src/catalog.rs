use itertools::Itertools;
use tracing::warn;

/// The serial ports currently attached to the host, sorted by name.
///
/// Never fails: if the OS query itself errors, the error is logged and an
/// empty list is returned. Callers treat "no ports" as a normal, displayable
/// state, not an error condition.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|port| port.port_name)
            .sorted()
            .collect(),
        Err(e) => {
            warn!(?e, "Could not enumerate serial ports");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Whatever is (or is not) attached to the machine running this,
    // enumeration must come back with a list.
    #[test]
    fn enumeration_never_fails() {
        let _ports = available_ports();
    }
}
