pub mod rand_compat;
