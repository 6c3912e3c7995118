//! 配置存储单元测试

mod hot_reload_tests;
