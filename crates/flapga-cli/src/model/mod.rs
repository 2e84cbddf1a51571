pub mod best_model;
