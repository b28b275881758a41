//! Detection of armored encrypted envelopes in message text.

/// Opening marker of an armored encrypted envelope.
pub const PGP_MESSAGE_BEGIN: &str = "-----BEGIN PGP MESSAGE-----";

/// Closing marker of an armored encrypted envelope.
pub const PGP_MESSAGE_END: &str = "-----END PGP MESSAGE-----";

/// Returns true when `content` contains both envelope markers.
///
/// A containment check, not an armor parse. Text that merely quotes an
/// envelope classifies as encrypted; the decrypt path fails soft on it.
pub fn is_pgp_message(content: &str) -> bool {
    content.contains(PGP_MESSAGE_BEGIN) && content.contains(PGP_MESSAGE_END)
}
