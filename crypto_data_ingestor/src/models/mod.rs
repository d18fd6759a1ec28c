pub mod bar;
pub mod pair;
pub mod request_params;
