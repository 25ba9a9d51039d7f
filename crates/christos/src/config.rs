//! Configuration constants for the Christos engine

/// Speech audio contract
///
/// The synthesis service returns raw PCM at a fixed format; these constants
/// describe that contract. The format is dictated by the service, not
/// negotiated per request.
pub mod speech {
    /// Sample rate of synthesized speech in Hz
    pub const SAMPLE_RATE: u32 = 24_000;

    /// Channel count of synthesized speech (mono)
    pub const CHANNELS: u16 = 1;

    /// Sample width in bits (signed, little-endian)
    pub const BITS_PER_SAMPLE: u16 = 16;
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Christos/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds. Generative requests can take a while to
    /// produce a full response, so this is deliberately generous.
    pub const READ_TIMEOUT_SECS: u64 = 120;
}
