pub mod db_lead;
pub mod lead;
