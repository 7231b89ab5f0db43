use serde::{Deserialize, Serialize};

use crate::page::Ref;

/// Course summary embedded in certificate responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateCourse {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: u64,
    pub course: Ref<CertificateCourse>,
    pub certificate_code: String,
    #[serde(default)]
    pub issued_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub verification_url: String,
}

impl Certificate {
    pub fn course_title(&self) -> String {
        match &self.course {
            Ref::Full(course) => course.title.clone(),
            Ref::Id(id) => format!("course #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateDownload {
    #[serde(default)]
    pub message: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateVerification {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}
