mod tailer_tests;
