// include version into the binary at compile time
pub fn get_sdk_version() -> &'static str {
    concat!("transporter-rs:", env!("CARGO_PKG_VERSION"))
}
