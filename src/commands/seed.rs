//! Seed command - Populates the database with demo data.
//!
//! Creates two teachers, five students, three courses and a handful of
//! enrollments. All demo accounts share the password `password123`.

use rust_decimal::Decimal;

use crate::config::Config;
use crate::domain::{CourseLevel, Faculty};
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{
    NewCourse, ServiceContainer, Services, StudentRegistration, TeacherRegistration,
};

const DEMO_PASSWORD: &str = "password123";

/// Execute the seed command.
///
/// Runs against an empty database; existing usernames make it fail with
/// a duplicate account error rather than overwrite anything.
pub async fn execute(config: Config) -> AppResult<()> {
    tracing::info!("Seeding demo data...");

    let db = Database::connect(&config).await;
    let invitation_code = config.teacher_invitation_code.clone();
    let services = Services::from_connection(db.get_connection(), config);

    // Teachers first; courses need their instructor ids
    let teachers = [
        teacher("teacher1", "Ivan", "Petrov", "Cybersecurity", &invitation_code),
        teacher("teacher2", "Maria", "Sidorova", "Web development", &invitation_code),
    ];

    let mut instructor_ids = Vec::new();
    for registration in teachers {
        let username = registration.username.clone();
        let registered = services.auth().register_teacher(registration).await?;
        let instructor = registered
            .instructor
            .ok_or_else(|| crate::errors::AppError::internal("teacher registered without instructor"))?;
        instructor_ids.push(instructor.id);
        tracing::info!(username = %username, "Created teacher");
    }

    let students = [
        student("anna", "Anna", "Ivanova", Faculty::Cs),
        student("dmitry", "Dmitry", "Smirnov", Faculty::Se),
        student("ekaterina", "Ekaterina", "Popova", Faculty::It),
        student("mikhail", "Mikhail", "Vasilyev", Faculty::Ds),
        student("olga", "Olga", "Novikova", Faculty::Web),
    ];

    let mut student_profiles = Vec::new();
    for registration in students {
        let username = registration.username.clone();
        let registered = services.auth().register_student(registration).await?;
        student_profiles.push(registered.profile.id);
        tracing::info!(username = %username, "Created student");
    }

    let courses = [
        NewCourse {
            title: "Python Basics".to_string(),
            slug: Some("python-basics".to_string()),
            description: "An introductory programming course in Python.".to_string(),
            duration_hours: 36,
            level: CourseLevel::Beginner,
            max_students: Some(25),
            price: Decimal::ZERO,
            instructor_id: Some(instructor_ids[0]),
        },
        NewCourse {
            title: "Web Security".to_string(),
            slug: Some("web-security".to_string()),
            description: "An advanced course on protecting web applications.".to_string(),
            duration_hours: 48,
            level: CourseLevel::Advanced,
            max_students: Some(20),
            price: Decimal::from(15_000),
            instructor_id: Some(instructor_ids[0]),
        },
        NewCourse {
            title: "Modern JavaScript".to_string(),
            slug: Some("modern-javascript".to_string()),
            description: "Current JavaScript language features in practice.".to_string(),
            duration_hours: 42,
            level: CourseLevel::Intermediate,
            max_students: Some(30),
            price: Decimal::from(12_000),
            instructor_id: Some(instructor_ids[1]),
        },
    ];

    let mut course_ids = Vec::new();
    for input in courses {
        let course = services.courses().create_course(input).await?;
        tracing::info!(slug = %course.slug, "Created course");
        course_ids.push(course.id);
    }

    // (student index, course index) pairs
    let enrollments = [(0, 0), (0, 1), (1, 0), (1, 2), (2, 0), (3, 1), (4, 2)];
    for (student_idx, course_idx) in enrollments {
        services
            .enrollments()
            .enroll(student_profiles[student_idx], course_ids[course_idx])
            .await?;
    }

    tracing::info!(
        teachers = instructor_ids.len(),
        students = student_profiles.len(),
        courses = course_ids.len(),
        enrollments = enrollments.len(),
        "Seeding complete"
    );
    println!("Demo credentials: teacher1 / {DEMO_PASSWORD}, anna / {DEMO_PASSWORD}");

    Ok(())
}

fn teacher(
    username: &str,
    first_name: &str,
    last_name: &str,
    specialization: &str,
    invitation_code: &str,
) -> TeacherRegistration {
    TeacherRegistration {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: DEMO_PASSWORD.to_string(),
        password_confirm: DEMO_PASSWORD.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        invitation_code: invitation_code.to_string(),
        specialization: specialization.to_string(),
        degree: None,
        academic_rank: None,
        department: None,
        office: None,
    }
}

fn student(
    username: &str,
    first_name: &str,
    last_name: &str,
    faculty: Faculty,
) -> StudentRegistration {
    StudentRegistration {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: DEMO_PASSWORD.to_string(),
        password_confirm: DEMO_PASSWORD.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        faculty,
        year_of_study: Some(2),
        student_card: None,
        birth_date: None,
    }
}
