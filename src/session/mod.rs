/// Framing session.
pub mod framing_session;
