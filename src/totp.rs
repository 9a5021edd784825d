// totp.rs
// TOTP utilities: build a TOTP instance and generate Base32 secrets.

use std::io::Cursor;

use anyhow::Result;
use data_encoding::BASE32_NOPAD;
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use rand::RngCore;
use totp_rs::{Algorithm, Secret, TOTP};

pub const MIN_SECRET_BYTES: usize = 16; // 128 bits (mandatory minimum)
pub const DEFAULT_SECRET_BYTES: usize = 20; // 160 bits (recommended)

/// Build a TOTP instance for the salon (issuer) and the user's email (account name).
/// Validates minimum secret length after Base32 decoding.
pub fn build_totp(issuer: &str, email: &str, base32_secret: &str) -> Result<TOTP> {
    let secret = Secret::Encoded(base32_secret.to_string()).to_bytes()?;
    if secret.len() < MIN_SECRET_BYTES {
        anyhow::bail!(
            "Shared secret too short: {} bytes, need >= {} ({} bits)",
            secret.len(),
            MIN_SECRET_BYTES,
            MIN_SECRET_BYTES * 8
        );
    }
    let totp = TOTP::new(
        Algorithm::SHA1, // compatible with Google Authenticator
        6,
        1, // skew: one step either side absorbs clock drift
        30,
        secret,
        Some(issuer.to_string()),
        email.to_string(),
    )?;
    Ok(totp)
}

/// Generate a random Base32 (NOPAD) secret of `bytes` length.
pub fn generate_base32_secret_n(bytes: usize) -> String {
    let n = bytes.max(MIN_SECRET_BYTES);
    let mut buf = vec![0u8; n];
    rand::rng().fill_bytes(&mut buf);
    BASE32_NOPAD.encode(&buf)
}

pub fn generate_base32_secret() -> String {
    generate_base32_secret_n(DEFAULT_SECRET_BYTES)
}

/// otpauth:// URL for enrolling the secret in an authenticator app.
pub fn provisioning_url(issuer: &str, email: &str, base32_secret: &str) -> Result<String> {
    Ok(build_totp(issuer, email, base32_secret)?.get_url())
}

/// PNG QR code of an otpauth URL so the user can scan and enroll.
pub fn qr_png(url: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(url.as_bytes())?;
    let img = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

    // image 0.25: write_to requires Write + Seek -> Cursor<Vec<u8>>
    let mut cursor = Cursor::new(Vec::<u8>::new());
    image::DynamicImage::ImageLuma8(img).write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}
