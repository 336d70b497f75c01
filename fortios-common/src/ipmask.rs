//! IP/netmask normalisation
//!
//! FortiOS answers subnet fields in `"10.0.0.0 255.255.255.0"` form even when
//! they were written as `"10.0.0.0/24"`. Converting the device form back to
//! CIDR keeps Terraform from reporting a permanent diff.

use std::net::Ipv4Addr;

/// Prefix length of a contiguous IPv4 netmask (`255.255.255.0` → 24).
pub fn mask_to_prefix_len(mask: &str) -> Option<u32> {
    let bits = u32::from(mask.parse::<Ipv4Addr>().ok()?);
    let len = bits.leading_ones();
    if bits.count_ones() == len {
        Some(len)
    } else {
        None
    }
}

/// Return the device value, rewritten to CIDR when the configured value is
/// CIDR and the device replied in `ip mask` form.
pub fn validate_conv_ipmask_to_cidr(configured: &str, device: &str) -> String {
    if configured != device && configured.contains('/') && device.contains(' ') {
        let mut parts = device.split_whitespace();
        if let (Some(ip), Some(mask)) = (parts.next(), parts.next()) {
            if let Some(len) = mask_to_prefix_len(mask) {
                return format!("{ip}/{len}");
            }
        }
    }
    device.to_string()
}
