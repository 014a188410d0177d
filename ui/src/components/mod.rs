pub mod app;
pub mod injected_provider;
pub mod request_detail;
pub mod request_form;
pub mod request_list;
pub mod session_state;
pub mod wallet_panel;
