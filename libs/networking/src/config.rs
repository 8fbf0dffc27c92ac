//! NIC configuration.

use ionos_mcm_cloud::NicProperties;

/// How a network interface is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicConfig {
    /// Fixed IP to bind, if any.
    pub ip: Option<String>,
    /// Whether DHCP is enabled.
    pub dhcp: bool,
    /// Whether the NIC firewall is active.
    pub firewall: bool,
}

impl Default for NicConfig {
    fn default() -> Self {
        Self {
            ip: None,
            dhcp: true,
            firewall: false,
        }
    }
}

impl NicConfig {
    /// Public-facing interface with the firewall enabled.
    pub fn wan() -> Self {
        Self {
            firewall: true,
            ..Self::default()
        }
    }

    /// Private worker-subnet interface without DHCP.
    pub fn without_dhcp() -> Self {
        Self {
            dhcp: false,
            ..Self::default()
        }
    }

    /// Bind `ip` to the interface.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Builds the request properties for an interface on `lan`.
    ///
    /// DHCP is only sent when disabled and the firewall only when enabled;
    /// the API defaults cover the rest.
    pub fn to_properties(&self, lan: i32) -> NicProperties {
        NicProperties {
            lan,
            ips: self.ip.clone().map(|ip| vec![ip]),
            dhcp: (!self.dhcp).then_some(false),
            firewall_active: self.firewall.then_some(true),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_properties() {
        let props = NicConfig::default().to_properties(1);
        assert_eq!(props.lan, 1);
        assert_eq!(props.ips, None);
        assert_eq!(props.dhcp, None);
        assert_eq!(props.firewall_active, None);
    }

    #[test]
    fn test_wan_with_ip() {
        let props = NicConfig::wan().with_ip("192.0.2.10").to_properties(2);
        assert_eq!(props.ips, Some(vec!["192.0.2.10".to_string()]));
        assert_eq!(props.dhcp, None);
        assert_eq!(props.firewall_active, Some(true));
    }

    #[test]
    fn test_without_dhcp() {
        let props = NicConfig::without_dhcp().to_properties(3);
        assert_eq!(props.dhcp, Some(false));
        assert_eq!(props.firewall_active, None);
    }
}
