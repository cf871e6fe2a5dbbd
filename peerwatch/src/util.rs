use std::net::IpAddr;

pub fn get_local_ip() -> IpAddr {
    local_ip_address::local_ip().expect("Failed to get local IP")
}
