pub mod fastembed;
