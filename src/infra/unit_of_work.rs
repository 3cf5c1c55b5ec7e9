//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories and manages transaction
//! lifecycle so compound writes (account + profile + instructor, or an
//! instructor delete with its course detach) commit or roll back as one.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    clear_instructor, delete_instructor, find_account_by_id, find_instructor_by_id,
    find_profile_by_id, insert_account, insert_instructor, insert_profile, AccountRepository,
    AccountStore, CourseRepository, CourseStore, EnrollmentRepository, EnrollmentStore,
    InstructorRepository, InstructorStore, ProfileRepository, ProfileStore,
};
use crate::domain::{Account, Instructor, Profile};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock at the repository level or use integration tests.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn accounts(&self) -> Arc<dyn AccountRepository>;

    fn profiles(&self) -> Arc<dyn ProfileRepository>;

    fn instructors(&self) -> Arc<dyn InstructorRepository>;

    fn courses(&self) -> Arc<dyn CourseRepository>;

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back on error.
    /// Uses ReadCommitted isolation level by default for balanced consistency/performance.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Backing store a transaction context writes through. Production code
/// always runs against a live database transaction; unit tests swap in
/// an in-memory recorder so compound writes can run to completion.
#[derive(Clone, Copy)]
enum TxBackend<'a> {
    Db(&'a DatabaseTransaction),
    #[cfg(test)]
    Recording(&'a RecordingTx),
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction. The context borrows the transaction
/// to ensure proper lifetime management.
pub struct TransactionContext<'a> {
    backend: TxBackend<'a>,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self {
            backend: TxBackend::Db(txn),
        }
    }

    #[cfg(test)]
    pub(crate) fn recording(recorder: &'a RecordingTx) -> Self {
        Self {
            backend: TxBackend::Recording(recorder),
        }
    }

    pub fn accounts(&self) -> TxAccountRepository<'_> {
        TxAccountRepository {
            backend: self.backend,
        }
    }

    pub fn profiles(&self) -> TxProfileRepository<'_> {
        TxProfileRepository {
            backend: self.backend,
        }
    }

    pub fn instructors(&self) -> TxInstructorRepository<'_> {
        TxInstructorRepository {
            backend: self.backend,
        }
    }

    pub fn courses(&self) -> TxCourseRepository<'_> {
        TxCourseRepository {
            backend: self.backend,
        }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    accounts: Arc<AccountStore>,
    profiles: Arc<ProfileStore>,
    instructors: Arc<InstructorStore>,
    courses: Arc<CourseStore>,
    enrollments: Arc<EnrollmentStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: Arc::new(AccountStore::new(db.clone())),
            profiles: Arc::new(ProfileStore::new(db.clone())),
            instructors: Arc::new(InstructorStore::new(db.clone())),
            courses: Arc::new(CourseStore::new(db.clone())),
            enrollments: Arc::new(EnrollmentStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
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
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-scoped account writes
pub struct TxAccountRepository<'a> {
    backend: TxBackend<'a>,
}

impl TxAccountRepository<'_> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        match self.backend {
            TxBackend::Db(txn) => find_account_by_id(txn, id).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.find_account(id),
        }
    }

    pub async fn create(&self, account: Account) -> AppResult<Account> {
        match self.backend {
            TxBackend::Db(txn) => insert_account(txn, account).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.create_account(account),
        }
    }
}

/// Transaction-scoped profile writes
pub struct TxProfileRepository<'a> {
    backend: TxBackend<'a>,
}

impl TxProfileRepository<'_> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        match self.backend {
            TxBackend::Db(txn) => find_profile_by_id(txn, id).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.find_profile(id),
        }
    }

    pub async fn create(&self, profile: Profile) -> AppResult<Profile> {
        match self.backend {
            TxBackend::Db(txn) => insert_profile(txn, profile).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.create_profile(profile),
        }
    }
}

/// Transaction-scoped instructor writes
pub struct TxInstructorRepository<'a> {
    backend: TxBackend<'a>,
}

impl TxInstructorRepository<'_> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Instructor>> {
        match self.backend {
            TxBackend::Db(txn) => find_instructor_by_id(txn, id).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.find_instructor(id),
        }
    }

    pub async fn create(&self, instructor: Instructor) -> AppResult<Instructor> {
        match self.backend {
            TxBackend::Db(txn) => insert_instructor(txn, instructor).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.create_instructor(instructor),
        }
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        match self.backend {
            TxBackend::Db(txn) => delete_instructor(txn, id).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.delete_instructor(id),
        }
    }
}

/// Transaction-scoped course writes
pub struct TxCourseRepository<'a> {
    backend: TxBackend<'a>,
}

impl TxCourseRepository<'_> {
    /// Null out the instructor reference on every course the given
    /// instructor teaches. Returns the number of courses detached.
    pub async fn clear_instructor(&self, instructor_id: Uuid) -> AppResult<u64> {
        match self.backend {
            TxBackend::Db(txn) => clear_instructor(txn, instructor_id).await,
            #[cfg(test)]
            TxBackend::Recording(rec) => rec.clear_instructor(instructor_id),
        }
    }
}

/// In-memory stand-in for a database transaction, used by service unit
/// tests. Writes are recorded so a test can assert what a compound
/// operation would have committed; `fail_next_write` injects a failure
/// mid-transaction.
#[cfg(test)]
pub struct RecordingTx {
    pub accounts: std::sync::Mutex<Vec<Account>>,
    pub profiles: std::sync::Mutex<Vec<Profile>>,
    pub instructors: std::sync::Mutex<Vec<Instructor>>,
    pub deleted_instructors: std::sync::Mutex<Vec<Uuid>>,
    pub cleared_instructors: std::sync::Mutex<Vec<Uuid>>,
    /// Value `clear_instructor` reports as the detached course count.
    pub detach_count: std::sync::Mutex<u64>,
    pub fail_next_write: std::sync::Mutex<Option<AppError>>,
}

#[cfg(test)]
impl Default for RecordingTx {
    fn default() -> Self {
        Self {
            accounts: std::sync::Mutex::new(Vec::new()),
            profiles: std::sync::Mutex::new(Vec::new()),
            instructors: std::sync::Mutex::new(Vec::new()),
            deleted_instructors: std::sync::Mutex::new(Vec::new()),
            cleared_instructors: std::sync::Mutex::new(Vec::new()),
            detach_count: std::sync::Mutex::new(0),
            fail_next_write: std::sync::Mutex::new(None),
        }
    }
}

#[cfg(test)]
impl RecordingTx {
    fn check_failure(&self) -> AppResult<()> {
        match self.fail_next_write.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_account(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    fn create_account(&self, account: Account) -> AppResult<Account> {
        self.check_failure()?;
        self.accounts.lock().unwrap().push(account.clone());
        Ok(account)
    }

    fn find_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn create_profile(&self, profile: Profile) -> AppResult<Profile> {
        self.check_failure()?;
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(profile)
    }

    fn find_instructor(&self, id: Uuid) -> AppResult<Option<Instructor>> {
        Ok(self
            .instructors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    fn create_instructor(&self, instructor: Instructor) -> AppResult<Instructor> {
        self.check_failure()?;
        self.instructors.lock().unwrap().push(instructor.clone());
        Ok(instructor)
    }

    fn delete_instructor(&self, id: Uuid) -> AppResult<()> {
        self.check_failure()?;
        self.deleted_instructors.lock().unwrap().push(id);
        Ok(())
    }

    fn clear_instructor(&self, instructor_id: Uuid) -> AppResult<u64> {
        self.check_failure()?;
        self.cleared_instructors.lock().unwrap().push(instructor_id);
        Ok(*self.detach_count.lock().unwrap())
    }
}
