//! Entities managed by the console and the capability interface they share.

pub mod bank_mutation;
pub mod company;
pub mod customer;
pub mod group_customer;
pub mod invoice;
pub mod parameter;
pub mod purchase_order;
pub mod region;
pub mod resource;
pub mod return_record;
pub mod supplier;
pub mod term_of_payment;
pub mod types;
