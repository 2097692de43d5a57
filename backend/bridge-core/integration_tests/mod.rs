mod ws_tests;
