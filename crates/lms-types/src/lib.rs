//! Wire types shared by the LMS client crates.
//!
//! These mirror the JSON bodies of the learning platform's REST API. Fields the
//! backend omits on some endpoints are optional or defaulted so that the same
//! type decodes list and detail responses.

mod admin;
mod auth;
mod certificate;
mod course;
mod enrollment;
mod page;

pub use admin::{
    ActivityActor, ActivityLogEntry, BackupResult, CategoryCount, CertificateStats,
    CourseAnalytics, DashboardStats, MonthlyCount, NewUser, PasswordChange, PopularCourse,
    RecentActivity, SystemMetrics, TimeRange, UserAnalytics, UserQuery, UserStatistics,
};
pub use auth::{
    AuthResponse, AuthTokens, LoginCredentials, MessageResponse, RefreshedTokens, RegisterData,
    TokenVerification, User,
};
pub use certificate::{
    Certificate, CertificateCourse, CertificateDownload, CertificateVerification,
};
pub use course::{
    Course, CourseCategory, CourseDraft, CourseFilters, CourseLevel, CourseStatus, Lesson,
    LessonType, Module, PriceFilter,
};
pub use enrollment::{Enrollment, LessonProgress, QuizAttempt, QuizSubmission, QuizSummary};
pub use page::{Listing, Paginated, Ref};
