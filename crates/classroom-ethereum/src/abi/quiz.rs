//! QuizContractFactory and QuizContract bindings

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface QuizContractFactory {
        struct QuizContractInfo {
            address contractAddress;
            address owner;
            uint256 createdAt;
        }

        event QuizContractCreated(address indexed quizContractAddress, address indexed owner);

        function createQuizContract(address initialOwner) external returns (address);
        function getQuizContracts() external view returns (QuizContractInfo[] memory);
        function getOwnerQuizContracts(address owner) external view returns (address[] memory);
        function getQuizContractCount() external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface QuizContract {
        event QuizCreated(uint256 indexed quizId, string title, uint256 lectureId);

        function createQuiz(string title, string description, uint256 expiresAt, uint256 lectureId)
            external
            returns (uint256);
        function addQuestion(uint256 quizId, string questionText, string[] options, uint256 correctOptionIndex)
            external;
        function addMultipleQuestions(
            uint256 quizId,
            string[] questionTexts,
            string[][] optionsArray,
            uint256[] correctOptionIndices
        ) external;
        function submitQuiz(uint256 quizId, uint256[] selectedOptions) external;
        function deactivateQuiz(uint256 quizId) external;

        function getActiveQuizzes() external view returns (uint256[] memory);
        function getQuizzesForLecture(uint256 lectureId) external view returns (uint256[] memory);
        function getQuiz(uint256 quizId)
            external
            view
            returns (
                uint256 id,
                string memory title,
                string memory description,
                uint256 createdAt,
                uint256 expiresAt,
                uint256 lectureId,
                bool isActive,
                uint256 questionCount
            );
        function getQuizQuestions(uint256 quizId) external view returns (uint256[] memory);
        function getQuestion(uint256 questionId)
            external
            view
            returns (string memory questionText, string[] memory options);
        function getQuizScore(address student, uint256 quizId)
            external
            view
            returns (bool hasAttempted, uint256 score, uint256 attemptedAt, uint256 totalQuestions);
    }
}
