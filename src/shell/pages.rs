//! Page catalogue of the shell.
//!
//! Pages own their fixed sample data; only the profile pages read the
//! session identity.

use serde::Serialize;

use crate::auth::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AdminDashboard,
    AdminStudents,
    AdminExams,
    AdminPapers,
    AdminResults,
    AdminProfile,
    StudentDashboard,
    StudentExams,
    StudentHistory,
    StudentProfile,
}

impl Page {
    pub const ALL: [Page; 10] = [
        Page::AdminDashboard,
        Page::AdminStudents,
        Page::AdminExams,
        Page::AdminPapers,
        Page::AdminResults,
        Page::AdminProfile,
        Page::StudentDashboard,
        Page::StudentExams,
        Page::StudentHistory,
        Page::StudentProfile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::AdminDashboard => "/admin/dashboard",
            Page::AdminStudents => "/admin/students",
            Page::AdminExams => "/admin/exams",
            Page::AdminPapers => "/admin/papers",
            Page::AdminResults => "/admin/results",
            Page::AdminProfile => "/admin/profile",
            Page::StudentDashboard => "/student/dashboard",
            Page::StudentExams => "/student/exams",
            Page::StudentHistory => "/student/history",
            Page::StudentProfile => "/student/profile",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.trim_end_matches('/');
        Page::ALL.into_iter().find(|p| p.path() == path)
    }

    pub fn expected_role(self) -> Role {
        match self {
            Page::AdminDashboard
            | Page::AdminStudents
            | Page::AdminExams
            | Page::AdminPapers
            | Page::AdminResults
            | Page::AdminProfile => Role::Admin,
            Page::StudentDashboard
            | Page::StudentExams
            | Page::StudentHistory
            | Page::StudentProfile => Role::Student,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::AdminDashboard => "Admin Dashboard",
            Page::AdminStudents => "Students",
            Page::AdminExams => "Exams",
            Page::AdminPapers => "Question Papers",
            Page::AdminResults => "Results",
            Page::AdminProfile => "Profile",
            Page::StudentDashboard => "Student Dashboard",
            Page::StudentExams => "My Exams",
            Page::StudentHistory => "Exam History",
            Page::StudentProfile => "Profile",
        }
    }

    /// The page's own role check. On mismatch returns the dashboard the
    /// viewer should be sent to instead.
    pub fn guard(self, role: Role) -> Result<(), &'static str> {
        if self.expected_role() == role {
            Ok(())
        } else {
            Err(role.dashboard())
        }
    }

    pub fn content(self, identity: &Identity) -> PageContent {
        match self {
            Page::AdminDashboard => PageContent::AdminDashboard(AdminDashboard::sample()),
            Page::StudentDashboard => PageContent::StudentDashboard(StudentDashboard::sample()),
            Page::AdminProfile | Page::StudentProfile => PageContent::Profile {
                identity: identity.clone(),
            },
            other => PageContent::Section {
                title: other.title(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    AdminDashboard(AdminDashboard),
    StudentDashboard(StudentDashboard),
    Profile { identity: Identity },
    Section { title: &'static str },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentExam {
    pub id: u32,
    pub title: &'static str,
    pub date: &'static str,
    pub students: u32,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub total_students: u32,
    pub active_exams: u32,
    pub completed_exams: u32,
    pub upcoming_exams: u32,
    pub recent_exams: Vec<RecentExam>,
}

impl AdminDashboard {
    fn sample() -> Self {
        let exam = |id, title, date, students, status| RecentExam {
            id,
            title,
            date,
            students,
            status,
        };
        Self {
            total_students: 156,
            active_exams: 8,
            completed_exams: 23,
            upcoming_exams: 5,
            recent_exams: vec![
                exam(1, "Mathematics Final", "2024-07-02", 45, "completed"),
                exam(2, "Physics Midterm", "2024-07-01", 38, "active"),
                exam(3, "Chemistry Quiz", "2024-06-30", 52, "completed"),
                exam(4, "Biology Test", "2024-06-29", 41, "upcoming"),
                exam(5, "English Essay", "2024-06-28", 35, "completed"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveExam {
    pub id: u32,
    pub title: &'static str,
    pub deadline: &'static str,
    pub duration: &'static str,
    pub difficulty: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingExam {
    pub id: u32,
    pub title: &'static str,
    pub date: &'static str,
    pub time: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PastExam {
    pub id: u32,
    pub title: &'static str,
    pub date: &'static str,
    pub score: u32,
    pub grade: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub total_exams: u32,
    pub average_score: f32,
    pub best_rank: u32,
    pub project_goal: u32,
    pub active_exams: Vec<ActiveExam>,
    pub upcoming_exams: Vec<UpcomingExam>,
    pub exam_history: Vec<PastExam>,
    pub study_recommendations: Vec<&'static str>,
}

impl StudentDashboard {
    fn sample() -> Self {
        Self {
            total_exams: 15,
            average_score: 87.5,
            best_rank: 3,
            project_goal: 90,
            active_exams: vec![
                ActiveExam {
                    id: 1,
                    title: "Physics Final",
                    deadline: "2024-07-05",
                    duration: "2 hours",
                    difficulty: "Hard",
                },
                ActiveExam {
                    id: 2,
                    title: "Chemistry Quiz",
                    deadline: "2024-07-06",
                    duration: "1 hour",
                    difficulty: "Medium",
                },
            ],
            upcoming_exams: vec![
                UpcomingExam { id: 3, title: "Biology Test", date: "2024-07-08", time: "10:00 AM" },
                UpcomingExam { id: 4, title: "Mathematics Final", date: "2024-07-10", time: "2:00 PM" },
                UpcomingExam { id: 5, title: "English Essay", date: "2024-07-12", time: "9:00 AM" },
            ],
            exam_history: vec![
                PastExam { id: 1, title: "Mathematics Midterm", date: "2024-06-28", score: 92, grade: "A" },
                PastExam { id: 2, title: "Physics Quiz", date: "2024-06-25", score: 88, grade: "B+" },
                PastExam { id: 3, title: "Chemistry Test", date: "2024-06-22", score: 85, grade: "B" },
                PastExam { id: 4, title: "Biology Quiz", date: "2024-06-20", score: 90, grade: "A-" },
            ],
            study_recommendations: vec![
                "Focus on Physics concepts for the upcoming final",
                "Review Chemistry molecular structures",
                "Practice more Mathematics problem-solving",
                "Improve English essay writing skills",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_roundtrip() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), Some(page));
        }
        assert_eq!(Page::from_path("/admin/exams/"), Some(Page::AdminExams));
        assert_eq!(Page::from_path("/admin/unknown"), None);
    }

    #[test]
    fn page_guard_sends_to_own_dashboard() {
        assert_eq!(Page::AdminDashboard.guard(Role::Admin), Ok(()));
        assert_eq!(Page::AdminDashboard.guard(Role::Student), Err("/student/dashboard"));
        assert_eq!(Page::StudentHistory.guard(Role::Admin), Err("/admin/dashboard"));
    }
}
