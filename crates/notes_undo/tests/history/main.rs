//! Integration tests for the undo history
//!
//! These tests verify that:
//! 1. The stack pointer stays inside the stack for every sequence of calls
//! 2. Capture transactions produce exactly one undo step
//! 3. Deleted note cards can be brought back by undo/redo


mod stack;
