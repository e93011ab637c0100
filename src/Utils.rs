//! different utility modules used around the slope field core
/// logger initialization and export of the field geometry into csv files
pub mod logger;
/// tiny module to draw a rendered field (or its diagnostic) into a png file
pub mod plots;
/// parse task document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3 " into a render task
pub mod task_parser;
