//! Certificate command handlers.

use anyhow::{Context, Result};
use lms_core::api;
use lms_core::http::AuthClient;
use lms_types::Certificate;
use serde_json::json;

use super::{Output, date_part};

pub async fn list(client: &AuthClient, out: Output) -> Result<()> {
    let certificates = api::certificates::list(client)
        .await
        .context("list certificates")?;

    out.emit(&certificates, |certificates| {
        if certificates.is_empty() {
            println!("No certificates yet.");
        }
        for certificate in certificates {
            println!(
                "{:>4}  {}  {}  issued {}",
                certificate.id,
                certificate.certificate_code,
                certificate.course_title(),
                date_part(&certificate.issued_at)
            );
        }
    })
}

pub async fn show(client: &AuthClient, out: Output, id: u64) -> Result<()> {
    let certificate = api::certificates::get(client, id)
        .await
        .with_context(|| format!("load certificate {id}"))?;
    let download = api::certificates::download(client, id)
        .await
        .with_context(|| format!("load download link for certificate {id}"))?;

    let view = json!({ "certificate": certificate, "download": download });
    out.emit(&view, |_| {
        print_certificate(&certificate);
        if !download.download_url.is_empty() {
            println!("  download: {}", download.download_url);
        }
    })
}

pub async fn verify(client: &AuthClient, out: Output, id: u64) -> Result<()> {
    let verification = api::certificates::verify(client, id)
        .await
        .with_context(|| format!("verify certificate {id}"))?;

    out.emit(&verification, |verification| {
        if verification.valid {
            println!("Certificate {id} is valid.");
            if let Some(certificate) = &verification.certificate {
                print_certificate(certificate);
            }
        } else {
            println!("Certificate {id} is NOT valid.");
        }
    })
}

pub async fn generate(client: &AuthClient, out: Output, enrollment: u64) -> Result<()> {
    let certificate = api::certificates::generate(client, enrollment)
        .await
        .with_context(|| format!("generate certificate for enrollment {enrollment}"))?;

    out.emit(&certificate, |certificate| {
        println!("Certificate issued: {}", certificate.certificate_code);
    })
}

fn print_certificate(certificate: &Certificate) {
    println!("{}  {}", certificate.certificate_code, certificate.course_title());
    println!("  issued:  {}", date_part(&certificate.issued_at));
    if let Some(expires) = certificate.expires_at.as_deref() {
        println!("  expires: {}", date_part(expires));
    }
    if !certificate.verification_url.is_empty() {
        println!("  verify:  {}", certificate.verification_url);
    }
}
