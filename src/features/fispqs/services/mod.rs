mod fispq_service;

pub use fispq_service::FispqService;
