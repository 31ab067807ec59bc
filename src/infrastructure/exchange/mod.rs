pub mod trade_desk;
