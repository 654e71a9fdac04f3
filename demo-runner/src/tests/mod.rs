mod utils;
