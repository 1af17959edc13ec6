pub mod catalog;
pub mod draw_list;
pub mod state;
pub mod template;
