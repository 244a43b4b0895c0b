use rand::RngCore;
use std::fmt::Write as _;

const TOKEN_BYTES: usize = 32;

/// Mints the opaque check-in token embedded in a shift's QR code.
///
/// 256 bits from the OS RNG, hex-encoded. Collisions are cryptographically
/// negligible; the UNIQUE column on `shifts.token` is still the arbiter of
/// record, so no issued-token state is kept in memory.
pub fn mint() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut buf);

    let mut out = String::with_capacity(TOKEN_BYTES * 2);
    for b in buf {
        let _ = write!(out, "{b:02x}");
    }
    out
}
