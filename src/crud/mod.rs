pub mod viewmodel;
