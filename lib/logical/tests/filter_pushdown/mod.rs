mod heuristic;
mod relocation;
mod test_utils;
