pub mod handlers;
pub mod header;
pub mod patches;
pub mod preview_area;
pub mod recipe_list;
pub mod recipes_page;
pub mod results;
pub mod upload_section;
pub mod utils;
