//! Shared test doubles for service unit tests.
//!
//! The unit of work trait has generic transaction methods, so it cannot
//! be automocked. This stub wires mockall repositories behind a real
//! `UnitOfWork` impl; transactional closures run against an in-memory
//! recording context so a test can assert what a compound write would
//! have committed, or inject a mid-transaction failure.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::infra::unit_of_work::TransactionContext;
use crate::infra::{
    AccountRepository, CourseRepository, EnrollmentRepository, InstructorRepository,
    MockAccountRepository, MockCourseRepository, MockEnrollmentRepository,
    MockInstructorRepository, MockProfileRepository, ProfileRepository, RecordingTx, UnitOfWork,
};

/// Unit of work backed by mock repositories and a recording transaction.
pub struct StubUnitOfWork {
    pub accounts: Arc<MockAccountRepository>,
    pub profiles: Arc<MockProfileRepository>,
    pub instructors: Arc<MockInstructorRepository>,
    pub courses: Arc<MockCourseRepository>,
    pub enrollments: Arc<MockEnrollmentRepository>,
    pub tx: Arc<RecordingTx>,
}

impl StubUnitOfWork {
    pub fn new(
        accounts: MockAccountRepository,
        profiles: MockProfileRepository,
        instructors: MockInstructorRepository,
        courses: MockCourseRepository,
        enrollments: MockEnrollmentRepository,
    ) -> Self {
        Self {
            accounts: Arc::new(accounts),
            profiles: Arc::new(profiles),
            instructors: Arc::new(instructors),
            courses: Arc::new(courses),
            enrollments: Arc::new(enrollments),
            tx: Arc::new(RecordingTx::default()),
        }
    }
}

impl Default for StubUnitOfWork {
    fn default() -> Self {
        Self::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        )
    }
}

#[async_trait]
impl UnitOfWork for StubUnitOfWork {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profiles.clone()
    }

    fn instructors(&self) -> Arc<dyn InstructorRepository> {
        self.instructors.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.courses.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.enrollments.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        f(TransactionContext::recording(&self.tx)).await
    }
}
