pub mod analytics;
pub mod attendance;
pub mod backup;
pub mod calc;
pub mod core;
pub mod exams;
pub mod fees;
pub mod salary;
pub mod staff;
pub mod students;
