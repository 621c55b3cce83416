mod scenario;
mod seal_matrix;
