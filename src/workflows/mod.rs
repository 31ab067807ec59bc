pub mod quote_confirmation;
