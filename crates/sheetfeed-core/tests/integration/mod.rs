mod cells;
mod rows;
