use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use super::candidate_type::CandidateType;

/// Maximum local preference (interface-insensitive)
pub const MAX_LOCAL_PREF: u16 = u16::MAX;

/// Offsets used in the priority calculation -> RFC 8445 §5.1.2.1
const TYPE_PREF_SHIFT: u32 = 24;
const LOCAL_PREF_SHIFT: u32 = 8;
const COMPONENT_OFFSET: u32 = 256;

/// Parsed form of an SDP `candidate:` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateInfo {
    /// Groups candidates sharing type, transport and base address.
    pub foundation: String,
    /// 1 = RTP; RTCP is multiplexed so 2 never appears here.
    pub component: u8,
    pub transport: String,
    pub priority: u32,
    pub address: SocketAddr,
    pub cand_type: CandidateType,
    /// raddr/rport, for reflexive and relayed candidates.
    pub related_address: Option<SocketAddr>,
}

impl CandidateInfo {
    /// Host candidate with foundation and priority computed from `local_pref`.
    #[must_use]
    pub fn host(address: SocketAddr, component: u8, local_pref: u16) -> Self {
        let transport = "udp".to_owned();
        Self {
            foundation: Self::calculate_foundation(
                CandidateType::Host,
                &transport,
                &address.ip().to_string(),
            ),
            component,
            priority: Self::calculate_priority(CandidateType::Host, local_pref, component),
            transport,
            address,
            cand_type: CandidateType::Host,
            related_address: None,
        }
    }

    // RFC 8445 §5.1.1.3: foundation, any stable identifier
    fn calculate_foundation(cand_type: CandidateType, transport_lc: &str, base_ip: &str) -> String {
        let mut hasher = DefaultHasher::new();
        format!("{cand_type}-{transport_lc}-{base_ip}").hash(&mut hasher);
        // Browsers emit 32-bit decimal foundations.
        format!("{}", hasher.finish() & u64::from(u32::MAX))
    }

    // RFC 8445 §5.1.2.1: 32-bit candidate priority
    #[must_use]
    pub const fn calculate_priority(cand_type: CandidateType, local_pref: u16, component_id: u8) -> u32 {
        (cand_type.preference() << TYPE_PREF_SHIFT)
            | ((local_pref as u32) << LOCAL_PREF_SHIFT)
            | (COMPONENT_OFFSET - component_id as u32)
    }
}

impl fmt::Display for CandidateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.address.ip(),
            self.address.port(),
            self.cand_type,
        )?;
        if let Some(rel) = self.related_address {
            write!(f, " raddr {} rport {}", rel.ip(), rel.port())?;
        }
        Ok(())
    }
}

impl FromStr for CandidateInfo {
    type Err = String;

    /// Accepts the attribute value with or without the `a=` and
    /// `candidate:` prefixes. Trailing extension tokens (`generation`,
    /// `network-id`, ...) are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("a=").unwrap_or(s);
        let s = s.strip_prefix("candidate:").unwrap_or(s);

        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() < 8 {
            return Err(format!("Invalid candidate string: '{s}'"));
        }

        let foundation = parts[0].to_string();
        if foundation.len() > 32 {
            return Err("Foundation longer than 32 characters".into());
        }
        let component: u8 = parts[1].parse().map_err(|_| "Invalid component")?;
        if component == 0 {
            return Err("Invalid component".into());
        }
        let transport = parts[2].to_ascii_lowercase();
        if transport != "udp" && transport != "tcp" {
            return Err(format!("Unsupported transport: {transport}"));
        }
        let priority: u32 = parts[3].parse().map_err(|_| "Invalid priority")?;
        let ip: IpAddr = parts[4].parse().map_err(|_| "Invalid IP address")?;
        let port: u16 = parts[5].parse().map_err(|_| "Invalid port")?;

        if parts[6] != "typ" {
            return Err("Missing 'typ' token in candidate".into());
        }
        let cand_type: CandidateType = parts[7].parse()?;

        let mut raddr: Option<IpAddr> = None;
        let mut rport: Option<u16> = None;
        let mut i = 8;
        while i + 1 < parts.len() {
            match parts[i] {
                "raddr" => {
                    raddr = Some(parts[i + 1].parse().map_err(|_| "Invalid raddr IP")?);
                    i += 2;
                }
                "rport" => {
                    rport = Some(parts[i + 1].parse().map_err(|_| "Invalid rport value")?);
                    i += 2;
                }
                _ => i += 1,
            }
        }
        let related_address = match (raddr, rport) {
            (Some(ip), Some(port)) => Some(SocketAddr::new(ip, port)),
            (None, None) => None,
            _ => return Err("raddr and rport must appear together".into()),
        };

        Ok(Self {
            foundation,
            component,
            transport,
            priority,
            address: SocketAddr::new(ip, port),
            cand_type,
            related_address,
        })
    }
}
