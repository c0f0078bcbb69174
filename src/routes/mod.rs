pub mod agent;
pub mod content;
pub mod docs;
pub mod event;
pub mod group;
pub mod insights;
pub mod member;
pub mod system;
pub mod task;
