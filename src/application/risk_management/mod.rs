pub mod position_manager;
pub mod sizing_engine;
