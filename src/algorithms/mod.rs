pub mod aead_wrapper;
pub mod block_wrapper;
pub mod digest_wrapper;
pub mod ecc_wrapper;
pub mod rsa_wrapper;
