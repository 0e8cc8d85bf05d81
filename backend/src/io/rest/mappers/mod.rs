pub mod cadet_mapper;
pub mod institution_mapper;
