//! Service-level unit tests against mock repositories.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::test_support::StubUnitOfWork;
use super::*;
use crate::config::Config;
use crate::domain::{
    Account, AdminData, AdminLevel, Course, CourseLevel, Enrollment, EnrollmentStatus, Faculty,
    Instructor, Password, Profile, RoleDetails, StudentData, TeacherData,
};
use crate::errors::AppError;
use crate::infra::{
    MockAccountRepository, MockCourseRepository, MockEnrollmentRepository,
    MockInstructorRepository, MockProfileRepository,
};

fn account_with_password(plain: &str) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        username: "avasileva".to_string(),
        email: "anna@example.com".to_string(),
        password_hash: Password::new(plain).unwrap().into_string(),
        first_name: "Anna".to_string(),
        last_name: "Vasileva".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn student_profile(account_id: Uuid) -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::new_v4(),
        account_id,
        avatar: None,
        phone: None,
        bio: None,
        details: RoleDetails::Student(StudentData {
            student_id: None,
            birth_date: None,
            faculty: Faculty::Se,
            year_of_study: 1,
        }),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn teacher_profile(account_id: Uuid) -> Profile {
    let mut profile = student_profile(account_id);
    profile.details = RoleDetails::Teacher(TeacherData {
        specialization: "Databases".to_string(),
        degree: String::new(),
        academic_rank: String::new(),
        department: String::new(),
        office: String::new(),
    });
    profile
}

/// A teacher row as the instructor join returns it
fn instructor_row(first: &str, last: &str) -> (Instructor, Profile, Account) {
    let now = Utc::now();
    let mut account = account_with_password("password123");
    account.first_name = first.to_string();
    account.last_name = last.to_string();
    account.email = format!("{}@example.com", first.to_lowercase());
    let profile = teacher_profile(account.id);
    let instructor = Instructor {
        id: Uuid::new_v4(),
        profile_id: profile.id,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    (instructor, profile, account)
}

fn course(max_students: u32, is_active: bool) -> Course {
    let now = Utc::now();
    Course {
        id: Uuid::new_v4(),
        title: "Web Security".to_string(),
        slug: "web-security".to_string(),
        description: "Protecting web applications.".to_string(),
        duration_hours: 48,
        instructor_id: None,
        level: CourseLevel::Advanced,
        max_students,
        price: Decimal::new(990000, 2),
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn student_registration() -> StudentRegistration {
    StudentRegistration {
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password: "correct-horse-battery".to_string(),
        password_confirm: "correct-horse-battery".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        faculty: Faculty::Cs,
        year_of_study: Some(2),
        student_card: None,
        birth_date: None,
    }
}

fn teacher_registration(code: &str) -> TeacherRegistration {
    TeacherRegistration {
        username: "epetrova".to_string(),
        email: "elena@example.com".to_string(),
        password: "correct-horse-battery".to_string(),
        password_confirm: "correct-horse-battery".to_string(),
        first_name: "Elena".to_string(),
        last_name: "Petrova".to_string(),
        invitation_code: code.to_string(),
        specialization: "Distributed systems".to_string(),
        degree: None,
        academic_rank: None,
        department: None,
        office: None,
    }
}

fn authenticator(uow: StubUnitOfWork) -> Authenticator<StubUnitOfWork> {
    Authenticator::new(Arc::new(uow), Config::for_tests())
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn short_password_is_rejected_before_any_lookup() {
        // No repository expectations: a lookup would panic the mock
        let auth = authenticator(StubUnitOfWork::default());

        let mut input = student_registration();
        input.password = "short".to_string();
        input.password_confirm = "short".to_string();

        let err = auth.register_student(input).await.unwrap_err();
        assert!(matches!(err, AppError::WeakPassword));
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let auth = authenticator(StubUnitOfWork::default());

        let mut input = student_registration();
        input.password_confirm = "something-else-entirely".to_string();

        let err = auth.register_student(input).await.unwrap_err();
        assert!(matches!(err, AppError::PasswordMismatch));
    }

    #[tokio::test]
    async fn wrong_invitation_code_fails_before_duplicate_check() {
        // Again no expectations: the code gate must fire first
        let auth = authenticator(StubUnitOfWork::default());

        let err = auth
            .register_teacher(teacher_registration("not-the-code"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInvitationCode));
    }

    #[tokio::test]
    async fn taken_username_maps_to_duplicate_account() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_username()
            .returning(|_| Ok(Some(account_with_password("password123"))));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let auth = authenticator(uow);

        let err = auth.register_student(student_registration()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAccount));
    }

    #[tokio::test]
    async fn taken_email_maps_to_duplicate_account() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_username().returning(|_| Ok(None));
        accounts
            .expect_find_by_email()
            .returning(|_| Ok(Some(account_with_password("password123"))));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let auth = authenticator(uow);

        let err = auth.register_student(student_registration()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAccount));
    }

    #[tokio::test]
    async fn student_registration_creates_account_with_one_profile() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_username().returning(|_| Ok(None));
        accounts.expect_find_by_email().returning(|_| Ok(None));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let tx = uow.tx.clone();
        let auth = authenticator(uow);

        let registered = auth.register_student(student_registration()).await.unwrap();

        assert_eq!(registered.account.username, "jdoe");
        assert_eq!(registered.profile.account_id, registered.account.id);
        assert!(registered.profile.is_student());
        assert!(registered.instructor.is_none());
        // The stored hash is real, not the plaintext
        assert!(
            Password::from_hash(registered.account.password_hash.clone())
                .verify("correct-horse-battery")
        );

        // Exactly one account and one profile written, no instructor row
        assert_eq!(tx.accounts.lock().unwrap().len(), 1);
        assert_eq!(tx.profiles.lock().unwrap().len(), 1);
        assert!(tx.instructors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn teacher_registration_provisions_instructor_in_same_transaction() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_username().returning(|_| Ok(None));
        accounts.expect_find_by_email().returning(|_| Ok(None));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let tx = uow.tx.clone();
        let auth = authenticator(uow);

        let registered = auth
            .register_teacher(teacher_registration("open-sesame"))
            .await
            .unwrap();

        assert!(registered.profile.is_teacher());
        let instructor = registered.instructor.expect("teacher path provisions an instructor");
        assert_eq!(instructor.profile_id, registered.profile.id);

        assert_eq!(tx.accounts.lock().unwrap().len(), 1);
        assert_eq!(tx.profiles.lock().unwrap().len(), 1);
        assert_eq!(tx.instructors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn write_failure_during_registration_surfaces_to_the_caller() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_username().returning(|_| Ok(None));
        accounts.expect_find_by_email().returning(|_| Ok(None));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let tx = uow.tx.clone();
        tx.fail_next_write
            .lock()
            .unwrap()
            .replace(AppError::internal("connection lost"));
        let auth = authenticator(uow);

        let err = auth.register_student(student_registration()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(tx.accounts.lock().unwrap().is_empty());
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn unknown_identifier_yields_invalid_credentials() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_identifier().returning(|_| Ok(None));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let auth = authenticator(uow);

        let err = auth
            .login("ghost".to_string(), "whatever-password".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_password_yields_invalid_credentials() {
        let account = account_with_password("password123");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(account.clone())));

        let uow = StubUnitOfWork::new(
            accounts,
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let auth = authenticator(uow);

        let err = auth
            .login("avasileva".to_string(), "wrong-password".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_bearer_token_with_role_claim() {
        let account = account_with_password("password123");
        let account_id = account.id;

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_identifier()
            .returning(move |_| Ok(Some(account.clone())));

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_account()
            .returning(move |_| Ok(Some(teacher_profile(account_id))));

        let uow = StubUnitOfWork::new(
            accounts,
            profiles,
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let auth = authenticator(uow);

        let token = auth
            .login("anna@example.com".to_string(), "password123".to_string())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.role, "TEACHER");
        assert_eq!(claims.username, "avasileva");
    }
}

mod enrollment {
    use super::*;

    fn manager(
        profiles: MockProfileRepository,
        courses: MockCourseRepository,
        enrollments: MockEnrollmentRepository,
    ) -> EnrollmentManager<StubUnitOfWork> {
        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            profiles,
            MockInstructorRepository::new(),
            courses,
            enrollments,
        );
        EnrollmentManager::new(Arc::new(uow))
    }

    #[tokio::test]
    async fn non_student_profile_cannot_enroll() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_id()
            .returning(|id| Ok(Some(teacher_profile(id))));

        let svc = manager(
            profiles,
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );

        let err = svc.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn inactive_course_rejects_enrollment() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_id()
            .returning(|_| Ok(Some(student_profile(Uuid::new_v4()))));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(|_| Ok(Some(course(30, false))));

        let svc = manager(profiles, courses, MockEnrollmentRepository::new());

        let err = svc.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn existing_pair_yields_already_enrolled() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_id()
            .returning(|_| Ok(Some(student_profile(Uuid::new_v4()))));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(|_| Ok(Some(course(30, true))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_find_by_pair().returning(|student, course| {
            let mut existing = Enrollment::new(Uuid::new_v4(), student, course);
            // Even a cancelled row blocks re-enrollment
            existing.cancel().unwrap();
            Ok(Some(existing))
        });

        let svc = manager(profiles, courses, enrollments);

        let err = svc.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEnrolled));
    }

    #[tokio::test]
    async fn full_course_still_accepts_enrollment() {
        // Capacity is advisory: the service never consults the active
        // count, so a max_students=1 course keeps accepting students.
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_id()
            .returning(|_| Ok(Some(student_profile(Uuid::new_v4()))));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(|_| Ok(Some(course(1, true))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_find_by_pair().returning(|_, _| Ok(None));
        enrollments.expect_create().returning(Ok);

        let svc = manager(profiles, courses, enrollments);

        let enrollment = svc.enroll(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Active);
    }

    #[tokio::test]
    async fn completing_cancelled_enrollment_fails_without_save() {
        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_find_by_id().returning(|id| {
            let mut e = Enrollment::new(id, Uuid::new_v4(), Uuid::new_v4());
            e.cancel().unwrap();
            Ok(Some(e))
        });
        // expect_save deliberately absent: persisting would panic

        let svc = manager(
            MockProfileRepository::new(),
            MockCourseRepository::new(),
            enrollments,
        );

        let err = svc.complete(Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn repeated_completion_preserves_timestamp() {
        let stamp = Utc::now() - chrono::Duration::days(3);

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_find_by_id().returning(move |id| {
            let mut e = Enrollment::new(id, Uuid::new_v4(), Uuid::new_v4());
            e.status = EnrollmentStatus::Completed;
            e.completed_at = Some(stamp);
            Ok(Some(e))
        });
        enrollments.expect_save().returning(Ok);

        let svc = manager(
            MockProfileRepository::new(),
            MockCourseRepository::new(),
            enrollments,
        );

        let saved = svc
            .complete(Uuid::new_v4(), Some("A".to_string()))
            .await
            .unwrap();
        assert_eq!(saved.completed_at, Some(stamp));
        assert_eq!(saved.grade.as_deref(), Some("A"));
    }
}

mod courses {
    use super::*;

    #[tokio::test]
    async fn oversubscribed_course_reports_negative_slots() {
        let shown = course(1, true);
        let course_id = shown.id;

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(shown.clone())));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_count_active_for_course()
            .returning(|_| Ok(3));

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            courses,
            enrollments,
        );
        let svc = CourseManager::new(Arc::new(uow));

        let stats = svc.get_course(course_id).await.unwrap();
        assert_eq!(stats.enrolled_students_count, 3);
        assert_eq!(stats.available_slots, -2);
    }

    #[tokio::test]
    async fn create_derives_slug_from_title_when_missing() {
        let mut courses = MockCourseRepository::new();
        courses.expect_create().returning(Ok);

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            MockInstructorRepository::new(),
            courses,
            MockEnrollmentRepository::new(),
        );
        let svc = CourseManager::new(Arc::new(uow));

        let created = svc
            .create_course(NewCourse {
                title: "Intro to Rust!".to_string(),
                slug: None,
                description: "Ownership and borrowing.".to_string(),
                duration_hours: 40,
                level: CourseLevel::Beginner,
                max_students: None,
                price: Decimal::ZERO,
                instructor_id: None,
            })
            .await
            .unwrap();

        assert_eq!(created.slug, "intro-to-rust");
        assert_eq!(created.max_students, 30);
    }

    #[tokio::test]
    async fn unknown_instructor_is_a_field_error() {
        let mut instructors = MockInstructorRepository::new();
        instructors.expect_find_by_id().returning(|_| Ok(None));

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            instructors,
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let svc = CourseManager::new(Arc::new(uow));

        let err = svc
            .create_course(NewCourse {
                title: "Orphan Course".to_string(),
                slug: None,
                description: "No such instructor.".to_string(),
                duration_hours: 10,
                level: CourseLevel::Beginner,
                max_students: None,
                price: Decimal::ZERO,
                instructor_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn instructor_listing_resolves_people_ordered_by_surname() {
        let mut instructors = MockInstructorRepository::new();
        instructors.expect_list_with_profiles().returning(|| {
            Ok(vec![
                instructor_row("Boris", "Zhukov"),
                instructor_row("Olga", "Antonova"),
            ])
        });

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            instructors,
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let svc = CourseManager::new(Arc::new(uow));

        let listed = svc.list_instructors().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].display_name, "Olga Antonova");
        assert_eq!(listed[1].display_name, "Boris Zhukov");
        // Personal fields come through the joined profile and account
        assert_eq!(listed[0].email, "olga@example.com");
        assert_eq!(listed[0].specialization, "Databases");
    }

    #[tokio::test]
    async fn get_instructor_exposes_name_and_email() {
        let (instructor, profile, account) = instructor_row("Ivan", "Petrov");
        let instructor_id = instructor.id;

        let mut instructors = MockInstructorRepository::new();
        instructors.expect_find_with_profile().returning(move |_| {
            Ok(Some((instructor.clone(), profile.clone(), account.clone())))
        });

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            instructors,
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let svc = CourseManager::new(Arc::new(uow));

        let found = svc.get_instructor(instructor_id).await.unwrap();
        assert_eq!(found.id, instructor_id);
        assert_eq!(found.display_name, "Ivan Petrov");
        assert_eq!(found.email, "ivan@example.com");
    }

    #[tokio::test]
    async fn delete_instructor_detaches_courses_before_removal() {
        let instructor_id = Uuid::new_v4();

        let mut instructors = MockInstructorRepository::new();
        instructors.expect_find_by_id().returning(|id| {
            let now = Utc::now();
            Ok(Some(Instructor {
                id,
                profile_id: Uuid::new_v4(),
                is_active: true,
                created_at: now,
                updated_at: now,
            }))
        });

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            MockProfileRepository::new(),
            instructors,
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let tx = uow.tx.clone();
        *tx.detach_count.lock().unwrap() = 2;
        let svc = CourseManager::new(Arc::new(uow));

        let detached = svc.delete_instructor(instructor_id).await.unwrap();
        assert_eq!(detached, 2);
        assert_eq!(*tx.cleared_instructors.lock().unwrap(), vec![instructor_id]);
        assert_eq!(*tx.deleted_instructors.lock().unwrap(), vec![instructor_id]);
    }
}

mod profiles {
    use super::*;

    #[tokio::test]
    async fn details_update_with_wrong_variant_is_rejected() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_id()
            .returning(|id| Ok(Some(student_profile(id))));

        let uow = StubUnitOfWork::new(
            MockAccountRepository::new(),
            profiles,
            MockInstructorRepository::new(),
            MockCourseRepository::new(),
            MockEnrollmentRepository::new(),
        );
        let svc = ProfileManager::new(Arc::new(uow));

        let err = svc
            .update_details(
                Uuid::new_v4(),
                RoleDetails::Admin(AdminData {
                    admin_level: AdminLevel::Moderator,
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
